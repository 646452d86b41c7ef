//! Age buckets, population distributions and the UN population loader

mod data;
pub mod loader;

pub use data::{
    AgeBucket, AgeSeries, PopulationDistribution, PopulationProportions, REFERENCE_BUCKET_WIDTH,
    REFERENCE_OPEN_AGE,
};
pub use loader::{load_un_population, population_proportions, un_population_from_reader, UnPopulation};
