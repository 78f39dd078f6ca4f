mod helpers;

mod code_test;
mod router_test;
