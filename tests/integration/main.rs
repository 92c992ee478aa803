//! Integration tests against an in-process fake Galleria server.

mod helpers;
mod sync_test;
