// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

pub fn build_cli() -> Command {
    Command::new("flipledger")
        .version(crate_version!())
        .about("Resale profit tracking and partner revenue-share settlement")
        .arg(
            Arg::new("owner")
                .long("owner")
                .global(true)
                .default_value("default")
                .help("Ledger owner the command operates on"),
        )
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("sale")
                .about("Record and inspect sales")
                .subcommand(
                    Command::new("add")
                        .about("Record a sale")
                        .arg(Arg::new("name").long("name").required(true).help("Item name"))
                        .arg(
                            Arg::new("bought")
                                .long("bought")
                                .required(true)
                                .help("Purchase price"),
                        )
                        .arg(Arg::new("sold").long("sold").required(true).help("Sold price"))
                        .arg(Arg::new("desc").long("desc").help("Optional description"))
                        .arg(
                            Arg::new("partners")
                                .long("partners")
                                .help("Comma-separated partner names sharing this sale's profit"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List sales")
                        .arg(Arg::new("month").long("month").help("Filter by YYYY-MM"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize))
                                .help("Show at most N sales"),
                        ),
                )),
        )
        .subcommand(
            Command::new("partner")
                .about("Manage revenue-share partners")
                .subcommand(
                    Command::new("add")
                        .about("Add a partner")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("percent")
                                .long("percent")
                                .required(true)
                                .help("Profit share in (0, 100]"),
                        ),
                )
                .subcommand(json_flags(Command::new("list").about("List partners")))
                .subcommand(
                    Command::new("rm")
                        .about("Remove a partner (drops their settlements and sale assignments)")
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("settle")
                .about("Record and inspect partner settlements")
                .subcommand(
                    Command::new("add")
                        .about("Pay out part of a partner's owed balance")
                        .arg(Arg::new("partner").long("partner").required(true))
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List settlements")
                        .arg(Arg::new("partner").long("partner").help("Filter by partner name")),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Reports")
                .subcommand(json_flags(
                    Command::new("balances").about("Per-partner earned / settled / owed"),
                ))
                .subcommand(json_flags(
                    Command::new("summary")
                        .about("Monthly sale count, cost, revenue, and profit")
                        .arg(
                            Arg::new("months")
                                .long("months")
                                .value_parser(value_parser!(usize))
                                .help("Show at most N months (default 12)"),
                        ),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Export ledger data")
                .subcommand(
                    Command::new("sales")
                        .about("Export sales")
                        .arg(Arg::new("format").long("format").required(true).help("csv|json"))
                        .arg(Arg::new("out").long("out").required(true).help("Output path")),
                )
                .subcommand(
                    Command::new("settlements")
                        .about("Export settlements")
                        .arg(Arg::new("format").long("format").required(true).help("csv|json"))
                        .arg(Arg::new("out").long("out").required(true).help("Output path")),
                ),
        )
        .subcommand(Command::new("doctor").about("Check the ledger for inconsistencies"))
}
