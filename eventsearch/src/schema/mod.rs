pub mod analysis;
pub mod fields;
pub mod mapping;

pub use analysis::{Analysis, AnalysisConfig};
pub use fields::{EventField, FieldContract, FieldKind, FieldSpec, SubField};
pub use mapping::{build_index_config, FieldMapping, IndexConfig, MappingType};
