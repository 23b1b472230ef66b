fn main() -> anyhow::Result<()> {
    chromix::driver::run()
}
