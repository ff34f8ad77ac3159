use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::error::Error;
use std::io::Write;
use std::io::{stdin, stdout};

use itertools::Itertools;

use card_offers::context::AppConfig;
use card_offers::loader::{load_snapshot, LoadReport};
use card_offers::lookup::Lookup;
use card_offers::models::{CardIdentity, CardKind, OfferGroup, OfferView};
use card_offers::suggest::Suggestions;

/// Everything the user has done so far. The engine itself stays read-only.
pub struct Session {
    lookup: Lookup,
    report: LoadReport,
    last_suggestions: Vec<CardIdentity>,
    selected: Option<CardIdentity>,
}

impl Session {
    pub async fn load(config: AppConfig) -> Self {
        let (snapshot, report) = load_snapshot(&config).await;
        Session {
            lookup: Lookup::new(snapshot, config),
            report,
            last_suggestions: Vec::new(),
            selected: None,
        }
    }

    async fn reload(&mut self) {
        let config = self.lookup.config().clone();
        let (snapshot, report) = load_snapshot(&config).await;
        self.lookup = Lookup::new(snapshot, config);
        self.report = report;
        self.last_suggestions.clear();
        self.selected = None;
    }
}

pub async fn main(session: &mut Session) -> Result<(), Box<dyn Error>> {
    print_chips(session)?;

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(session, line).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(stdout(), "{err}")?;
                stdout().flush()?;
            }
        }
    }

    Ok(())
}

fn joined(matches: &ArgMatches, id: &str) -> String {
    matches
        .get_many::<String>(id)
        .map(|mut values| values.join(" "))
        .unwrap_or_default()
}

async fn respond(session: &mut Session, line: &str) -> Result<bool, Box<dyn Error>> {
    let args = shlex::split(line).ok_or("error: Invalid quoting")?;
    let matches = cli().try_get_matches_from(args)?;
    match matches.subcommand() {
        Some(("ping", _matches)) => {
            writeln!(stdout(), "Pong")?;
        }
        Some(("quit", _matches)) => {
            writeln!(stdout(), "Exiting ...")?;
            stdout().flush()?;
            return Ok(true);
        }
        Some(("search", matches)) => {
            let query = joined(matches, "query");
            search(session, &query)?;
        }
        Some(("pick", matches)) => {
            let idx = *matches.get_one::<usize>("index").ok_or("error: Missing index")?;
            let card = session
                .last_suggestions
                .get(idx.wrapping_sub(1))
                .cloned()
                .ok_or("error: No suggestion with that number\n")?;
            select(session, card)?;
        }
        Some(("card", matches)) => {
            let kind = if matches.get_flag("debit") {
                CardKind::Debit
            } else {
                CardKind::Credit
            };
            let card = session.lookup.select_chip(&joined(matches, "name"), kind);
            select(session, card)?;
        }
        Some(("offers", matches)) => match session.selected.clone() {
            Some(card) if matches.get_flag("json") => {
                let groups = session.lookup.offers_for(&card);
                writeln!(stdout(), "{}", serde_json::to_string_pretty(&groups)?)?;
            }
            Some(card) => print_offers(session, &card)?,
            None => writeln!(stdout(), "No card selected")?,
        },
        Some(("chips", _matches)) => {
            print_chips(session)?;
        }
        Some(("reload", _matches)) => {
            session.reload().await;
            writeln!(stdout(), "Reloaded")?;
            print_chips(session)?;
        }
        Some((name, _matches)) => {
            return Err(format!("error: Invalid command {}\n", name).into());
        }
        None => unreachable!("subcommand required"),
    }
    stdout().flush()?;

    Ok(false)
}

fn search(session: &mut Session, query: &str) -> Result<(), Box<dyn Error>> {
    session.last_suggestions.clear();
    match session.lookup.suggest(query) {
        Suggestions::NoQuery => {}
        Suggestions::NoMatch { fallback } => {
            writeln!(stdout(), "No matching card")?;
            if let Some(card) = fallback {
                select(session, card)?;
            }
        }
        Suggestions::Matches(groups) => {
            let mut number = 1;
            for group in groups {
                writeln!(stdout(), "{}", group.label())?;
                for card in group.cards {
                    writeln!(stdout(), "  {:>2}. {}", number, card.display_name)?;
                    session.last_suggestions.push(card);
                    number += 1;
                }
            }
        }
    }
    Ok(())
}

fn select(session: &mut Session, card: CardIdentity) -> Result<(), Box<dyn Error>> {
    writeln!(stdout(), "Selected {}", card)?;
    print_offers(session, &card)?;
    session.selected = Some(card);
    Ok(())
}

fn print_offers(session: &Session, card: &CardIdentity) -> Result<(), Box<dyn Error>> {
    let groups = session.lookup.offers_for(card);
    if groups.is_empty() {
        writeln!(stdout(), "No offers for {}", card.display_name)?;
        return Ok(());
    }
    for group in groups {
        print_group(&group)?;
    }
    Ok(())
}

fn print_group(group: &OfferGroup) -> Result<(), Box<dyn Error>> {
    writeln!(stdout(), "== {} ==", group.site)?;
    for offer in &group.offers {
        print_offer(offer)?;
    }
    Ok(())
}

fn print_offer(offer: &OfferView) -> Result<(), Box<dyn Error>> {
    let mut out = stdout();
    writeln!(out, "- {}", offer.title.as_deref().unwrap_or("Offer"))?;
    if let Some(desc) = &offer.description {
        writeln!(out, "    {}", desc)?;
    }
    if offer.inbuilt {
        writeln!(out, "    This is an inbuilt feature of this credit card")?;
    }
    if let Some(code) = &offer.coupon_code {
        writeln!(out, "    Coupon: {}", code)?;
    }
    if let Some(variant) = &offer.variant_note {
        writeln!(out, "    Note: applicable only on the {} variant", variant)?;
    }
    if let Some(image) = offer.fallback_image.as_ref().or(offer.image_url.as_ref()) {
        writeln!(out, "    Image: {}", image)?;
    }
    if let Some(link) = &offer.link {
        writeln!(out, "    {}", link)?;
    }
    Ok(())
}

fn print_chips(session: &Session) -> Result<(), Box<dyn Error>> {
    let with_offers = &session.lookup.catalogs().with_offers;
    let mut out = stdout();
    writeln!(out, "Credit And Debit Cards Which Have Offers")?;
    for kind in [CardKind::Credit, CardKind::Debit] {
        let catalog = with_offers.of_kind(kind);
        if !catalog.is_empty() {
            writeln!(out, "{}: {}", kind.heading(), catalog.names().join(" | "))?;
        }
    }

    let failed = session.report.failed_offer_sites();
    if with_offers.debit.is_empty() && !failed.is_empty() {
        writeln!(
            out,
            "Debit-card list is empty because these offer tables could not be loaded: {}",
            failed.iter().map(|site| site.to_string()).join(", ")
        )?;
    }
    out.flush()?;
    Ok(())
}

fn cli() -> Command {
    // strip out usage
    const PARSER_TEMPLATE: &str = "\
        {all-args}
    ";
    // strip out name/version
    const COMMAND_TEMPLATE: &str = "\
        {about-with-newline}\n\
        {usage-heading}\n    {usage}\n\
        \n\
        {all-args}{after-help}\
    ";

    Command::new("repl")
        .multicall(true)
        .arg_required_else_help(true)
        .subcommand_required(true)
        .subcommand_value_name("COMMAND")
        .subcommand_help_heading("COMMANDS")
        .help_template(PARSER_TEMPLATE)
        .subcommand(
            Command::new("search")
                .alias("s")
                .about("Suggest cards matching the query")
                .arg(Arg::new("query").num_args(0..).allow_hyphen_values(true))
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("pick")
                .alias("p")
                .about("Select a card by its number in the last suggestions")
                .arg(Arg::new("index").required(true).value_parser(value_parser!(usize)))
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("card")
                .about("Select a card by name, as from the offers strip")
                .arg(Arg::new("name").required(true).num_args(1..))
                .arg(
                    Arg::new("debit")
                        .long("debit")
                        .action(ArgAction::SetTrue)
                        .help("Treat the card as a debit card"),
                )
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("offers")
                .about("Show offers for the selected card")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the offer groups as JSON"),
                )
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("chips")
                .about("List cards that carry at least one offer")
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("reload")
                .about("Reload every table from disk")
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("ping")
                .about("Get a response")
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("quit")
                .alias("exit")
                .alias("q")
                .alias(":q")
                .about("Quit the REPL")
                .help_template(COMMAND_TEMPLATE),
        )
}

fn readline() -> Result<String, Box<dyn Error>> {
    write!(stdout(), "> ")?;
    stdout().flush()?;
    let mut buffer = String::new();
    stdin().read_line(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cli_parses_commands() {
        let matches = cli()
            .try_get_matches_from(["card", "HDFC", "Regalia", "--debit"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "card");
        assert_eq!(joined(sub, "name"), "HDFC Regalia");
        assert!(sub.get_flag("debit"));

        let matches = cli().try_get_matches_from(["pick", "3"]).unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<usize>("index"), Some(&3));

        assert!(cli().try_get_matches_from(["pick", "x"]).is_err());

        let matches = cli().try_get_matches_from(["offers", "--json"]).unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert!(sub.get_flag("json"));
    }
}
