/*
 * SPDX-FileCopyrightText: Copyright (c) 2022 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: MIT
 *
 * Permission is hereby granted, free of charge, to any person obtaining a
 * copy of this software and associated documentation files (the "Software"),
 * to deal in the Software without restriction, including without limitation
 * the rights to use, copy, modify, merge, publish, distribute, sublicense,
 * and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in
 * all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL
 * THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
 * FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
 * DEALINGS IN THE SOFTWARE.
 */

/* Lab BMC tool
 * Power and local account management for lab machines, by machine name.
 *
 * USAGE: labbmc -m node07 -R -c create-account alice s3cret operator
 * -m: machine name as recorded in the machine inventory.
 * Run with no params for help.
 * Run with `-v` for more output.
 */

use std::process::ExitCode;

use anyhow::anyhow;
use lab_redfish::lab::JsonInventory;
use lab_redfish::{LabBmc, LabBmcConnection, LoginOptions};
use tracing::{error, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::prelude::*;

const COMMANDS: &str = "Command to run:
                power-state
                power-on
                power-off
                list-accounts
                get-account NAME
                create-account NAME PASSWORD [ROLE]
                delete-account NAME
                set-password NAME PASSWORD";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = getopts::Options::new();

    opts.optflag("h", "help", "Print this help");
    opts.optflag("v", "verbose", "Log at DEBUG level. Default is INFO");
    opts.optopt("m", "machine", "Required. Lab machine name", "MACHINE");
    opts.optopt(
        "",
        "inventory",
        "Machine inventory file. Default is $LAB_MACHINE_INVENTORY or ./machines.json",
        "PATH",
    );
    opts.optopt("c", "cmd", COMMANDS, "CMD");
    LoginOptions::add_argument_definitions(&mut opts);

    let usage = opts.usage("labbmc -m machine [login options] -c cmd [args]");
    let args_given = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{e}\n{usage}");
            return ExitCode::from(2);
        }
    };
    if args_given.opt_present("h") || !args_given.opt_present("m") {
        eprintln!("{usage}");
        return ExitCode::SUCCESS;
    }

    let log_level = if args_given.opt_present("v") {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let mut env_filter = EnvFilter::from_default_env().add_directive(log_level.into());
    for noisy in ["hyper=warn", "reqwest=warn"] {
        if let Ok(directive) = noisy.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }
    tracing_subscriber::registry()
        .with(Layer::default().compact())
        .with(env_filter)
        .init();

    match run(&args_given) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args_given: &getopts::Matches) -> Result<(), anyhow::Error> {
    let machine = args_given
        .opt_str("m")
        .ok_or_else(|| anyhow!("No machine given"))?;
    let inventory_path = JsonInventory::default_path(args_given.opt_str("inventory").as_deref());
    let inventory = JsonInventory::load(&inventory_path)?;
    let login = LoginOptions::from_matches(args_given);

    let Some(cmd) = args_given.opt_str("c") else {
        return Err(anyhow!("No command given"));
    };
    let params = &args_given.free;
    let param = |i: usize| {
        params
            .get(i)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("{cmd} needs more arguments"))
    };

    let mut bmc = LabBmcConnection::create_connection(&machine, &login, false, &inventory)?;
    info!(
        "Connected to {} ({}) as {}",
        bmc.machine_name(),
        bmc.host(),
        bmc.username()
    );

    match cmd.as_str() {
        "power-state" => {
            info!("{}", bmc.get_power_state()?);
        }
        "power-on" => {
            info!("{:?}", bmc.system_power_on()?);
        }
        "power-off" => {
            info!("{:?}", bmc.system_power_off()?);
        }
        "list-accounts" => {
            let mut accounts: Vec<_> = bmc.get_all_accounts()?.into_values().collect();
            accounts.sort_by_key(|a| a.slot_id().unwrap_or(u32::MAX));
            for a in accounts {
                info!(
                    "{:>3} {:<16} {:<14} enabled={}",
                    a.id,
                    a.username,
                    a.role_id.as_deref().unwrap_or("-"),
                    a.enabled.unwrap_or(false)
                );
            }
        }
        "get-account" => match bmc.get_account(param(0)?)? {
            Some(a) => info!("{}", serde_json::to_string_pretty(&a)?),
            None => return Err(anyhow!("Account \"{}\" doesn't exist.", param(0)?)),
        },
        "create-account" => {
            bmc.create_account(param(0)?, param(1)?, params.get(2).map(String::as_str))?;
        }
        "delete-account" => {
            bmc.delete_account(param(0)?)?;
        }
        "set-password" => {
            bmc.set_account_password(param(0)?, param(1)?)?;
        }
        other => return Err(anyhow!("Unknown command {other}")),
    }
    Ok(())
}
