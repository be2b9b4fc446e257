mod helpers;
mod rendering;
mod streaming_scenarios;
