//! End-to-end flows over the scripted transport.

mod coordinator_tests;
mod gateway_tests;
mod relay_tests;
