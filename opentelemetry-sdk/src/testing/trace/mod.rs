mod in_memory_exporter;

pub use in_memory_exporter::InMemorySpanExporter;
