//! Integration tests for uv-impact
//!
//! Each test builds a throwaway git repository holding a uv workspace and drives the
//! compiled binary against it.

mod helpers;
mod test_affected;
