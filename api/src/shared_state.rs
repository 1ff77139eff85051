use std::sync::Arc;

use pr_reviewers_engine::Engine;

#[derive(Debug)]
pub struct InnerState {
    pub production: bool,
    pub engine: Engine,
}

pub type State = Arc<InnerState>;
