use thiserror::Error;

use crate::tree::NodeId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("container {0:?} has no parent to lay out against")]
    NoParent(NodeId),
    #[error("container {0:?} no longer exists")]
    StaleNode(NodeId),
    #[error("adding {child:?} to {parent:?} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },
    #[error("the tree has no root container")]
    NoRoot,
    #[error("event loop error: {0}")]
    EventLoop(#[from] calloop::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
