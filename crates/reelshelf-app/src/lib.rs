// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod browse;
pub mod error;
pub mod filter;
pub mod forms;
pub mod highlights;
pub mod ids;
pub mod model;
pub mod search;
pub mod state;

pub use browse::*;
pub use error::*;
pub use filter::*;
pub use forms::*;
pub use highlights::*;
pub use ids::*;
pub use model::*;
pub use search::*;
pub use state::*;
