mod common;
mod pipeline;
mod profiles;
