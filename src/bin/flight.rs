fn main() -> anyhow::Result<()> {
    glider::app::run()
}
