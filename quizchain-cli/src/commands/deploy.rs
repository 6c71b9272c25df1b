use clap::Subcommand;
use quizchain_core::{FactoryId, InstanceId, QuizNode, Result};

#[derive(Subcommand)]
pub enum DeployCommands {
    /// Deploy the shared quiz logic (the master instance)
    Logic,
    /// Deploy a factory bound to deployed logic
    Factory {
        /// Implementation handle
        logic: u64,
    },
    /// Deploy a fresh clone through a factory
    Instance {
        /// Factory handle
        factory: u64,
        /// Logic handle the clone delegates to
        logic: u64,
    },
    /// Deploy logic, a factory and one clone in one go
    All,
}

pub async fn handle_deploy_command(cmd: DeployCommands, node: &QuizNode) -> Result<()> {
    match cmd {
        DeployCommands::Logic => {
            let logic = node.deploy_logic().await?;
            println!("Quiz logic deployed at handle {}", logic);
        }
        DeployCommands::Factory { logic } => {
            let factory = node.deploy_factory(InstanceId::new(logic)).await?;
            println!("Factory {} deployed, delegating to logic {}", factory, logic);
        }
        DeployCommands::Instance { factory, logic } => {
            let instance = node
                .deploy_instance(FactoryId::new(factory), InstanceId::new(logic))
                .await?;
            println!("Instance deployed at handle {}", instance);
        }
        DeployCommands::All => {
            let logic = node.deploy_logic().await?;
            println!("Quiz logic deployed at handle {}", logic);

            let factory = node.deploy_factory(logic).await?;
            println!("Factory deployed at handle {}", factory);

            let instance = node.deploy_instance(factory, logic).await?;
            println!("Instance deployed at handle {}", instance);
        }
    }

    Ok(())
}
