use std::io;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::commands::SegmarkCli;

pub fn completions_handler(shell: Shell) {
    let mut command = SegmarkCli::command();
    let name = command.get_name().to_owned();
    clap_complete::generate(shell, &mut command, name, &mut io::stdout());
}
