//! Cross-cutting tests exercising the grid through its public API.

mod props;
