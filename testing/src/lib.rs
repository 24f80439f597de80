//! # Tidy Testing
//!
//! Testing utilities for reducers built on `tidy-core`.
//!
//! This crate provides:
//! - [`ReducerTest`]: a Given-When-Then harness for a single reduction or a
//!   short sequence of them
//! - [`assertions`]: helpers for inspecting the effects a reduction returned
//!
//! ## Example
//!
//! ```ignore
//! use tidy_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(environment)
//!     .given_state(TodoState::default())
//!     .when_action(TodoAction::DeleteAllTodos)
//!     .then_state(|state| assert!(state.todos.is_empty()))
//!     .then_effects(assertions::assert_has_future_effect)
//!     .run();
//! ```

pub mod reducer_test;

pub use reducer_test::{assertions, ReducerTest};
