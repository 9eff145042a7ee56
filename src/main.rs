use log::error;

fn main() {
    env_logger::init();

    if let Err(e) = circle_crossing::get_arg().and_then(circle_crossing::run) {
        error!("{e:#}");
        std::process::exit(-1);
    }
}
