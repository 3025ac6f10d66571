use crate::messages::{feedback_text, format_event};
use glint_core::{
    nodes, Actor, ActorId, ActorMode, EventBus, Feedback, Location, Outcome, Payload,
    PermissionProvider, Persistence, Rejection, RewardRecord, RewardService, WorldResolver,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const CONSOLE: &str = "console";

/// Lets the console through every check before asking the configured provider.
pub struct ConsolePermissions(pub Box<dyn PermissionProvider>);

impl PermissionProvider for ConsolePermissions {
    fn check_permission(&self, actor: &Actor, node: &str) -> bool {
        actor.id.as_str() == CONSOLE || self.0.check_permission(actor, node)
    }

    fn name(&self) -> &'static str {
        self.0.name()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            quit: false,
        }
    }

    fn feedback(feedback: Feedback) -> Self {
        Self::line(feedback_text(feedback))
    }

    fn rejected(rejection: &Rejection) -> Self {
        Self::line(format!(
            "{} ({rejection})",
            feedback_text(Feedback::rejected(rejection))
        ))
    }
}

/// Drives a [`RewardService`] from text commands the way a game server would
/// from player input.
pub struct Host<P> {
    service: RewardService<P>,
    worlds: Arc<dyn WorldResolver>,
    names: HashMap<ActorId, String>,
    pending_clear: Option<(ActorId, Instant)>,
}

impl<P: Persistence> Host<P> {
    pub fn new(service: RewardService<P>, worlds: Arc<dyn WorldResolver>) -> Self {
        Self {
            service,
            worlds,
            names: HashMap::new(),
            pending_clear: None,
        }
    }

    pub fn service(&self) -> &RewardService<P> {
        &self.service
    }

    pub fn execute(&mut self, line: &str, now: Instant) -> Reply {
        let line = line.split('#').next().unwrap_or_default().trim();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let mut events = EventBus::default();
        let mut reply = match tokens.as_slice() {
            [] => Reply::default(),
            ["help"] => {
                crate::messages::print_help();
                Reply::default()
            }
            ["quit"] | ["exit"] => Reply {
                lines: Vec::new(),
                quit: true,
            },
            ["join", actor, name @ ..] if !name.is_empty() => {
                let name = name.join(" ");
                self.names.insert(ActorId::new(*actor), name.clone());
                Reply::line(format!("{name} joined"))
            }
            ["leave", actor] => {
                let actor = ActorId::new(*actor);
                self.service.on_disconnect(&actor);
                if self.pending_clear.as_ref().is_some_and(|(pending, _)| *pending == actor) {
                    self.pending_clear = None;
                }
                let name = self.names.remove(&actor).unwrap_or_else(|| actor.to_string());
                Reply::line(format!("{name} left"))
            }
            [actor, command, args @ ..] => {
                let actor = self.actor(actor);
                self.actor_command(&actor, command, args, now, &mut events)
            }
            _ => Reply::line(format!("unknown command: {line} (try 'help')")),
        };
        reply
            .lines
            .extend(events.drain().map(|event| format!("event: {}", format_event(&event))));
        reply
    }

    fn actor(&self, id: &str) -> Actor {
        let id = ActorId::new(id);
        let name = self
            .names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string());
        Actor { id, name }
    }

    fn actor_command(
        &mut self,
        actor: &Actor,
        command: &str,
        args: &[&str],
        now: Instant,
        events: &mut EventBus,
    ) -> Reply {
        if let Some(node) = required_node(command) {
            if !self.service.has_permission(actor, node) {
                return Reply::rejected(&Rejection::NoPermission(node.to_string()));
            }
        }
        match (command, args) {
            ("set", [] | [_]) => {
                let category = args.first().copied();
                match self
                    .service
                    .enter_setup_mode(&actor.id, category, events)
                {
                    Ok(previous) => {
                        let current = self.service.modes().mode(&actor.id);
                        Reply::feedback(Feedback::mode_change(&previous, &current))
                    }
                    Err(rejection) => Reply::rejected(&rejection),
                }
            }
            ("remove", []) => {
                let previous = self.service.enter_remove_mode(&actor.id, events);
                Reply::feedback(Feedback::mode_change(&previous, &ActorMode::Remove))
            }
            ("exit", []) => {
                let previous = self.service.exit_mode(&actor.id, events);
                Reply::feedback(Feedback::mode_change(&previous, &ActorMode::None))
            }
            ("use", [world, x, y, z, rest @ ..]) => {
                let location = match parse_location(world, x, y, z) {
                    Ok(location) => location,
                    Err(err) => return Reply::line(err),
                };
                let held = match parse_held(rest) {
                    Ok(held) => held,
                    Err(err) => return Reply::line(err),
                };
                self.interact(actor, &location, held.as_ref(), events)
            }
            ("attack", [world, x, y, z]) => match parse_location(world, x, y, z) {
                Ok(location) if self.service.is_protected(&location) => {
                    Reply::line("This block holds a reward and cannot be broken.")
                }
                Ok(location) => Reply::line(format!("broke the block at {location}")),
                Err(err) => Reply::line(err),
            },
            ("near", [world, x, y, z]) => match parse_location(world, x, y, z) {
                Ok(origin) => {
                    let nearby = self.service.unclaimed_in_range(&actor.id, &origin);
                    let mut reply =
                        Reply::line(format!("{} unclaimed reward(s) nearby", nearby.len()));
                    reply.lines.extend(nearby.iter().map(describe_record));
                    reply
                }
                Err(err) => Reply::line(err),
            },
            ("list", [] | [_]) => match self.service.list_entries(args.first().copied()) {
                Ok(records) => {
                    let mut reply = Reply::line(format!("{} reward(s)", records.len()));
                    reply.lines.extend(records.iter().map(describe_record));
                    reply
                }
                Err(rejection) => Reply::rejected(&rejection),
            },
            ("create", [name]) => match self.service.create_category(name) {
                Ok(true) => Reply::line(format!("category {name} created")),
                Ok(false) => Reply::line(format!("category {name} already exists")),
                Err(rejection) => Reply::rejected(&rejection),
            },
            ("categories", []) => {
                let names: Vec<String> = self.service.list_categories().into_iter().collect();
                Reply::line(format!("categories: {}", names.join(", ")))
            }
            ("reload", []) => {
                let count = self
                    .service
                    .reload(Some(Arc::clone(&self.worlds)), events);
                Reply::line(format!("reloaded {count} reward(s)"))
            }
            ("reset", [target]) => {
                let count = self.service.reset_claims(&ActorId::new(*target), events);
                Reply::line(format!("reset {count} claim(s) for {target}"))
            }
            ("clearall", []) => self.clear_all(actor, now, events),
            ("completion", ["add", category, command @ ..]) if !command.is_empty() => {
                match self
                    .service
                    .add_completion_command(category, &command.join(" "))
                {
                    Ok(index) => Reply::line(format!("added completion command {index} to {category}")),
                    Err(rejection) => Reply::rejected(&rejection),
                }
            }
            ("completion", ["remove", category, index]) => {
                let Ok(index) = index.parse::<usize>() else {
                    return Reply::line(format!("invalid index '{index}'"));
                };
                match self.service.remove_completion_command(category, index) {
                    Ok(command) => Reply::line(format!("removed completion command: {command}")),
                    Err(rejection) => Reply::rejected(&rejection),
                }
            }
            ("completion", ["list", rest @ ..]) if rest.len() <= 1 => {
                match self.service.completion_commands(rest.first().copied()) {
                    Ok(all) => {
                        let mut reply = Reply::line(format!("{} category(ies) with commands", all.len()));
                        for (category, commands) in all {
                            for (index, command) in commands.iter().enumerate() {
                                reply.lines.push(format!("  {category} [{index}] {command}"));
                            }
                        }
                        reply
                    }
                    Err(rejection) => Reply::rejected(&rejection),
                }
            }
            _ => Reply::line(format!("unknown command: {command} (try 'help')")),
        }
    }

    fn interact(
        &self,
        actor: &Actor,
        location: &Location,
        held: Option<&Payload>,
        events: &mut EventBus,
    ) -> Reply {
        let interaction = self.service.handle_interaction(actor, location, held, events);
        let mut reply = Reply::feedback(interaction.feedback());
        match &interaction.outcome {
            Outcome::Claimed(claim) => {
                reply.lines.push(format!("received {}", claim.payload));
                if let Some(completion) = &claim.completion {
                    reply.lines.extend(
                        completion
                            .commands
                            .iter()
                            .map(|command| format!("dispatch: {command}")),
                    );
                }
            }
            Outcome::Rejected(rejection) if !interaction.passes_through() => {
                reply = Reply::rejected(rejection);
            }
            _ => {}
        }
        reply
    }

    /// The first `clearall` arms, a second one by the same actor inside the
    /// confirmation window runs it.
    fn clear_all(&mut self, actor: &Actor, now: Instant, events: &mut EventBus) -> Reply {
        let window = Duration::from_secs(self.service.config().clear_confirmation_secs);
        let confirmed = matches!(
            &self.pending_clear,
            Some((pending, armed)) if *pending == actor.id && now.duration_since(*armed) <= window
        );
        if !confirmed {
            self.pending_clear = Some((actor.id.clone(), now));
            return Reply::line(format!(
                "This deletes {} reward(s). Repeat 'clearall' within {}s to confirm.",
                self.service.store().count(),
                window.as_secs()
            ));
        }
        self.pending_clear = None;
        let count = self.service.clear_all(events);
        Reply::line(format!("cleared {count} reward(s)"))
    }
}

fn required_node(command: &str) -> Option<&'static str> {
    match command {
        "set" => Some(nodes::COMMAND_SET),
        "remove" => Some(nodes::COMMAND_REMOVE),
        "list" | "categories" => Some(nodes::COMMAND_LIST),
        "create" => Some(nodes::COMMAND_CREATE),
        "reload" => Some(nodes::COMMAND_RELOAD),
        "reset" => Some(nodes::COMMAND_RESET),
        "clearall" => Some(nodes::COMMAND_CLEARALL),
        "completion" => Some(nodes::COMMAND_COMPLETION),
        _ => None,
    }
}

fn parse_location(world: &str, x: &str, y: &str, z: &str) -> Result<Location, String> {
    let coord = |value: &str| {
        value
            .parse::<i32>()
            .map_err(|_| format!("invalid coordinate '{value}'"))
    };
    Ok(Location::new(world, coord(x)?, coord(y)?, coord(z)?))
}

fn parse_held(args: &[&str]) -> Result<Option<Payload>, String> {
    match args {
        [] => Ok(None),
        [item] => Ok(Some(Payload::new(*item, 1))),
        [item, count] => {
            let count = count
                .parse::<u32>()
                .map_err(|_| format!("invalid count '{count}'"))?;
            Ok(Some(Payload::new(*item, count)))
        }
        _ => Err("too many arguments for use".to_string()),
    }
}

fn describe_record(record: &RewardRecord) -> String {
    format!(
        "  [{}] {} -> {} ({} claim(s))",
        record.category(),
        record.location(),
        record.payload(),
        record.claimants().len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::{
        ItemRegistry, MemoryPersistence, OperatorPermissions, RewardStore, ServiceConfig,
        StaticWorlds,
    };

    fn host() -> Host<MemoryPersistence> {
        let worlds: Arc<dyn WorldResolver> = Arc::new(
            StaticWorlds::new().with_world("minecraft:overworld", ItemRegistry::open()),
        );
        let store = RewardStore::open(MemoryPersistence::new(), Some(Arc::clone(&worlds)));
        let permissions = ConsolePermissions(Box::new(OperatorPermissions::default()));
        let service = RewardService::new(store, Box::new(permissions), ServiceConfig::default());
        Host::new(service, worlds)
    }

    fn run(host: &mut Host<MemoryPersistence>, line: &str) -> Vec<String> {
        host.execute(line, Instant::now()).lines
    }

    #[test]
    fn place_then_claim() {
        let mut host = host();
        run(&mut host, "join alex Alex");
        run(&mut host, "console set");
        let placed = run(&mut host, "console use minecraft:overworld 1 64 1 minecraft:diamond 2");
        assert_eq!(placed[0], feedback_text(Feedback::RewardCreated));

        let claimed = run(&mut host, "alex use minecraft:overworld 1 64 1");
        assert_eq!(claimed[0], feedback_text(Feedback::RewardClaimed));
        assert_eq!(claimed[1], "received 2x minecraft:diamond");
        let again = run(&mut host, "alex use minecraft:overworld 1 64 1");
        assert!(again[0].starts_with(feedback_text(Feedback::AlreadyClaimed)));

        let protected = run(&mut host, "alex attack minecraft:overworld 1 64 1");
        assert!(protected[0].contains("cannot be broken"));
    }

    #[test]
    fn commands_need_permission() {
        let mut host = host();
        let reply = run(&mut host, "alex clearall");
        assert!(reply[0].starts_with(feedback_text(Feedback::NoPermission)));
        let reply = run(&mut host, "alex set");
        assert!(reply[0].starts_with(feedback_text(Feedback::NoPermission)));
        assert!(!host.service().modes().is_setup(&ActorId::new("alex")));
    }

    #[test]
    fn clearall_needs_confirmation_in_window() {
        let mut host = host();
        run(&mut host, "console set");
        run(&mut host, "console use minecraft:overworld 0 0 0 minecraft:apple");
        let start = Instant::now();
        let first = host.execute("console clearall", start).lines;
        assert!(first[0].contains("Repeat"));
        assert_eq!(host.service().store().count(), 1);

        let late = start + Duration::from_secs(31);
        let expired = host.execute("console clearall", late).lines;
        assert!(expired[0].contains("Repeat"));
        assert_eq!(host.service().store().count(), 1);

        let confirmed = host
            .execute("console clearall", late + Duration::from_secs(1))
            .lines;
        assert_eq!(confirmed[0], "cleared 1 reward(s)");
        assert_eq!(host.service().store().count(), 0);
    }

    #[test]
    fn completion_commands_are_dispatched_on_completion() {
        let mut host = host();
        run(&mut host, "join alex Alex");
        run(&mut host, "console create eggs");
        run(&mut host, "console completion add eggs give {player} minecraft:cake");
        run(&mut host, "console set eggs");
        run(&mut host, "console use minecraft:overworld 0 0 0 minecraft:egg");
        let claimed = run(&mut host, "alex use minecraft:overworld 0 0 0");
        assert_eq!(claimed[0], feedback_text(Feedback::CategoryCompleted));
        assert!(claimed.contains(&"dispatch: give Alex minecraft:cake".to_string()));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let mut host = host();
        assert!(run(&mut host, "   # nothing here").is_empty());
        assert!(host.execute("quit", Instant::now()).quit);
    }
}
