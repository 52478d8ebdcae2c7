mod configuration;
mod monitor;
mod readers;
