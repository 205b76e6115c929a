//! Command line interface

use bdnet::network::generators::{adder, carry_chain, random, testcases};
use bdnet::network::stats::stats;
use bdnet::Network;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug messages; RUST_LOG takes precedence
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Command line arguments
#[derive(Subcommand)]
pub enum Commands {
    /// Show statistics about a generated logic network
    ///
    /// Will print statistics on the number of inputs, outputs and gates in the network.
    #[clap()]
    Show(ShowArgs),

    /// Print a generated logic network, node by node
    #[clap()]
    Dump(DumpArgs),
}

/// Kind of network to generate
#[derive(Clone, Copy, ValueEnum)]
pub enum Generator {
    /// Ripple-carry adder
    Adder,
    /// Ripple-carry chain
    CarryChain,
    /// Balanced Xor tree
    Parity,
    /// Chain of flip-flops
    Toggle,
    /// Random logic
    Random,
}

/// Network generation arguments shared by all commands
#[derive(Args)]
pub struct GenArgs {
    /// Kind of network
    #[arg(value_enum)]
    generator: Generator,

    /// Size of the network, in bits or gates
    #[arg(short = 'n', long, default_value_t = 8)]
    size: usize,

    /// Seed for random networks
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Remove unused logic after generation
    #[arg(long)]
    clean_up: bool,
}

impl GenArgs {
    fn generate(&self) -> Network {
        let mut net = match self.generator {
            Generator::Adder => adder::ripple_carry(self.size),
            Generator::CarryChain => carry_chain::ripple_carry(self.size),
            Generator::Parity => testcases::parity_tree(self.size),
            Generator::Toggle => testcases::toggle_chain(self.size.max(1)),
            Generator::Random => {
                let nb_inputs = self.size.max(1);
                random::random_logic(nb_inputs, 4 * self.size, nb_inputs, self.seed)
            }
        };
        if self.clean_up {
            net.clean_up();
        }
        net.check();
        net
    }
}

/// Command arguments for network statistics
#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    network: GenArgs,
}

impl ShowArgs {
    pub fn run(&self) {
        let net = self.network.generate();
        println!("Network {} stats:\n{}\n\n", net.name(), stats(&net));
    }
}

/// Command arguments for network dump
#[derive(Args)]
pub struct DumpArgs {
    #[command(flatten)]
    network: GenArgs,
}

impl DumpArgs {
    pub fn run(&self) {
        let net = self.network.generate();
        print!("{net}");
    }
}
