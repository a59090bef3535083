// Adapters layer: readers/writers for the tables that feed the chart engine.

pub mod table;
