//! Controller tests driven through substituted collaborators.

mod behaviour;
mod support;
