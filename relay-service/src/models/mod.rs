pub mod requests;

pub use requests::{
    CreateKind, CreateRequest, MediaProcessRequest, MediaTask, RelayResponse, SubGenRequest,
    TranslateRequest,
};
