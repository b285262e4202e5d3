use rask_log_shipper::app;

fn main() -> anyhow::Result<()> {
    app::run(std::env::args_os())
}
