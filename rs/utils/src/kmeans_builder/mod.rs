pub mod kmeans_builder;
