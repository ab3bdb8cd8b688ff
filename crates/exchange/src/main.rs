fn main() -> anyhow::Result<()> {
    exchange::main()
}
