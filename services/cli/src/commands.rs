use crate::cli::{AddArgs, Command, SearchArgs, TemplateArgs};
use crate::render;
use estate_lots::error::AppError;
use estate_lots::exchange::{LotCsvExporter, LotCsvImporter};
use estate_lots::inventory::{LotError, LotRegistry, NamedFilter, SearchCriteria};

/// Text to print and whether the inventory changed and needs saving.
#[derive(Debug)]
pub(crate) struct Execution {
    pub(crate) output: String,
    pub(crate) mutated: bool,
}

impl Execution {
    fn read(output: String) -> Self {
        Self {
            output,
            mutated: false,
        }
    }

    fn write(output: String, mutated: bool) -> Self {
        Self { output, mutated }
    }
}

pub(crate) fn execute(
    command: Command,
    registry: &LotRegistry,
    json: bool,
) -> Result<Execution, AppError> {
    match command {
        Command::List { status } => {
            let criteria = status.map_or_else(SearchCriteria::new, |status| {
                SearchCriteria::new().status(status)
            });
            Ok(Execution::read(render::lots(&registry.search(&criteria), json)?))
        }
        Command::Show { id } => {
            let view = registry
                .get(&id)
                .ok_or_else(|| LotError::NotFound(id.trim().to_string()))?;
            Ok(Execution::read(render::lots(std::slice::from_ref(&view), json)?))
        }
        Command::Add(AddArgs {
            block,
            lot,
            size,
            price,
        }) => {
            let view = registry.add_lot(block, lot, size, price)?;
            Ok(Execution::write(format!("Added: {view}"), true))
        }
        Command::Template(TemplateArgs { name, block, lot }) => {
            let view = registry.add_from_template(&name, block, lot)?;
            Ok(Execution::write(format!("Added: {view}"), true))
        }
        Command::Status { id, status } => {
            let change = registry.change_status(&id, &status)?;
            Ok(Execution::write(render::change(&change), change.is_changed()))
        }
        Command::Feature { id, feature } => {
            let change = registry.add_feature(&id, &feature)?;
            Ok(Execution::write(render::change(&change), change.is_changed()))
        }
        Command::Search(args) => {
            let criteria = search_criteria(args);
            Ok(Execution::read(render::lots(&registry.search(&criteria), json)?))
        }
        Command::Filter { name } => {
            let filter: NamedFilter = name.parse()?;
            Ok(Execution::read(render::lots(&registry.filter(filter), json)?))
        }
        Command::Report => Ok(Execution::read(render::report(&registry.report(), json)?)),
        Command::Export { path } => {
            let written = LotCsvExporter::to_path(&path, &registry.all())?;
            Ok(Execution::read(format!(
                "Exported {written} lot(s) to {}",
                path.display()
            )))
        }
        Command::Import { path } => {
            let summary = LotCsvImporter::from_path(&path, registry)?;
            let output = render::import(&summary, json)?;
            Ok(Execution::write(output, summary.imported > 0))
        }
    }
}

fn search_criteria(args: SearchArgs) -> SearchCriteria {
    let SearchArgs {
        min_size,
        max_size,
        min_price,
        max_price,
        block,
        status,
    } = args;

    SearchCriteria {
        min_size,
        max_size,
        min_price,
        max_price,
        block,
        status,
    }
}
