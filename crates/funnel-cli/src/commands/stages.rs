use funnel_core::stages::StageRegistry;
use funnel_core::types::Terminal;

/// Run the `stages` subcommand.
pub fn run(registry: &StageRegistry) {
    for (idx, stage) in registry.iter().enumerate() {
        let marker = match stage.terminal {
            Some(Terminal::Won) => " [won]",
            Some(Terminal::Lost) => " [lost]",
            None => "",
        };
        println!("{:>2}. {:<14} {:<14} {}{}", idx + 1, stage.key, stage.title, stage.color, marker);
    }
}
