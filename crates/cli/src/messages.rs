use glint_core::{Event, Feedback};

pub fn feedback_text(feedback: Feedback) -> &'static str {
    match feedback {
        Feedback::RewardCreated => "Reward placed.",
        Feedback::RewardRemoved => "Reward removed.",
        Feedback::RewardClaimed => "You found a reward!",
        Feedback::CategoryCompleted => "You found a reward and completed the whole set!",
        Feedback::EmptyHand => "Hold the item you want to place as a reward.",
        Feedback::InvalidLocation => "That location is not in a loaded world.",
        Feedback::NoRewardAtLocation => "There is no reward at that location.",
        Feedback::RewardAlreadyHere => "A reward already sits here. Remove it first or pick another block.",
        Feedback::AlreadyClaimed => "You already claimed this reward.",
        Feedback::UnknownCategory => "That category does not exist.",
        Feedback::InvalidCategoryName => "Category names may only use letters, digits, '_' and '-'.",
        Feedback::NoSuchCompletionCommand => "No completion command with that index.",
        Feedback::NoPermission => "You do not have permission to do that.",
        Feedback::PassThrough => "Nothing special here.",
        Feedback::SetupModeEnabled => "Setup mode enabled: use a block while holding the reward.",
        Feedback::SetupModeDisabled => "Setup mode disabled.",
        Feedback::RemoveModeEnabled => "Remove mode enabled: use a reward block to delete it.",
        Feedback::RemoveModeDisabled => "Remove mode disabled.",
        Feedback::NoModeActive => "No mode is active.",
    }
}

pub fn format_event(event: &Event) -> String {
    match event {
        Event::RewardCreated {
            location,
            category,
            actor,
        } => format!("{actor} placed a {category} reward at {location}"),
        Event::RewardRemoved { location, actor } => {
            format!("{actor} removed the reward at {location}")
        }
        Event::RewardClaimed {
            location,
            actor,
            payload,
        } => format!("{actor} claimed {payload} at {location}"),
        Event::CategoryCompleted {
            category,
            actor,
            commands,
        } => format!(
            "{actor} completed {category}, dispatching {} command(s)",
            commands.len()
        ),
        Event::ModeChanged { actor, from, to } => format!("{actor} mode {from:?} -> {to:?}"),
        Event::ClaimsReset { actor, count } => format!("reset {count} claim(s) of {actor}"),
        Event::RewardsCleared { count } => format!("cleared {count} reward(s)"),
        Event::Reloaded { count, deferred } => {
            format!("reloaded {count} reward(s), {deferred} deferred")
        }
    }
}

pub fn print_help() {
    println!("Commands (one per line, '#' starts a comment):");
    println!("  join <actor> <name>                     register an actor");
    println!("  leave <actor>                           disconnect an actor");
    println!("  <actor> set [category]                  enter setup mode");
    println!("  <actor> remove                          enter remove mode");
    println!("  <actor> exit                            leave the current mode");
    println!("  <actor> use <world> <x> <y> <z> [item [count]]");
    println!("                                          interact with a block");
    println!("  <actor> attack <world> <x> <y> <z>      try to break a block");
    println!("  <actor> near <world> <x> <y> <z>        unclaimed rewards nearby");
    println!("  <actor> list [category]                 list rewards");
    println!("  <actor> create <category>               create a category");
    println!("  <actor> categories                      list categories");
    println!("  <actor> reload                          reload reward data");
    println!("  <actor> reset <target>                  let a player claim again");
    println!("  <actor> clearall                        delete every reward (twice to confirm)");
    println!("  <actor> completion add <category> <command...>");
    println!("  <actor> completion remove <category> <index>");
    println!("  <actor> completion list [category]");
    println!("  help | quit");
    println!("The actor 'console' holds every permission.");
}
