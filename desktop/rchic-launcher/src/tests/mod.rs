mod backend_watch;
mod cli;
mod logging;
mod progress;
