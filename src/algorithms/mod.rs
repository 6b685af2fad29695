pub mod dijkstra;

pub use dijkstra::{calculate_shortest_paths, ShortestPaths};
