pub mod engine;
pub mod selection;

pub use engine::{
    random_fact, simulated_result, AnalysisEngine, ProgressSink, ProgressUpdate,
    SimulatedAnalysisEngine, ENERGY_FACTS,
};
pub use selection::{
    AddReport, Preview, PreviewHandles, PreviewRegistry, RunRejection, UploadSelection,
    FILE_ICON, PDF_ICON,
};
