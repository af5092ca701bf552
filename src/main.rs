fn main() -> anyhow::Result<()> {
    microjathon::run()
}
