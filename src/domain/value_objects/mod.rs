//! Value objects - Immutable objects defined by their attributes

mod asset_folder;
mod creation_input;
mod generated;
mod ids;
mod naming;
mod pipeline_stage;
mod settings;

pub use asset_folder::{
    ArtifactKind, AssetFolder, BASE_DATA_FILE, BASE_IMAGE_NAME, DESCRIPTION_FILE,
};
pub use creation_input::{CreationInput, InputError, MAX_TEXT_LENGTH};
pub use generated::{
    ElementType, EnhancedDescription, ExpressionCategory, ExpressionItem, ExpressionSet,
    MoveCategory, MoveItem, MoveList,
};
pub use ids::*;
pub use naming::{creature_folder_name, fits_folder_name, normalize_name, MAX_NAME_BYTES};
pub use pipeline_stage::{InvalidTransition, PipelineStage};
pub use settings::PipelineSettings;
