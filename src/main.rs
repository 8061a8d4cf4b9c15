use ReactorD::Examples::pfr_examples::pfr_examples;
use ReactorD::Utils::logger::init_logger;
use log::{LevelFilter, error};

pub fn main() {
    init_logger(LevelFilter::Info);
    //
    let task: usize = 0;
    if let Err(e) = pfr_examples(task) {
        error!("example {} failed: {}", task, e);
    }
}
