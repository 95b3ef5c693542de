use anyhow::Result;

fn main() -> Result<()> {
    reasoning_tree_renderer::run()
}
