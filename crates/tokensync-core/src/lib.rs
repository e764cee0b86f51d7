pub mod machine;
pub mod path;

pub use machine::{MACHINE_ID_ENV, machine_id, machine_id_from};
pub use path::{
    Error, Result, WORKSPACE_ENV, checkpoint_path, config_path, expand_tilde,
    resolve_workspace_path, resolve_workspace_path_from,
};
