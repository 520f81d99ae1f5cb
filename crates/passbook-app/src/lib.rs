// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod browse;
pub mod form;
pub mod generate;
pub mod ids;
pub mod menu;
pub mod model;
pub mod registry;
pub mod service;
pub mod workspace;

pub use browse::*;
pub use form::*;
pub use generate::*;
pub use ids::*;
pub use menu::*;
pub use model::*;
pub use registry::*;
pub use service::*;
pub use workspace::*;
