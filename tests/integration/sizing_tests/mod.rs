mod config;
mod missions;
mod properties;
mod scenarios;
mod sweeps;
