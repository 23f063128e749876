mod model_loaders;

pub use model_loaders::{
    load_bim_file_middleware, load_clash_middleware, load_project_middleware, load_task_middleware,
};
