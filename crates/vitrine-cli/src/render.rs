//! Render command: evaluate the snippet once and print the result.

use crate::session::{Outcome, Session, SnippetArgs};

pub async fn execute(args: &SnippetArgs) -> anyhow::Result<()> {
    let session = Session::start(args).await?;
    match session.outcome() {
        Outcome::Unit(node) => {
            if args.html {
                println!("{}", node.to_html());
            } else {
                println!("{}", node.to_text());
            }
            Ok(())
        }
        Outcome::Error(descriptor) => anyhow::bail!("{descriptor}"),
        Outcome::Pending => anyhow::bail!("the program never called render(...)"),
    }
}
