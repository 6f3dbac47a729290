use anyhow::Result;

fn main() -> Result<()> {
    geo_reconcile::run()
}
