//! Learnings command: list what the hooks would surface for a project

use pro_workflow_core::{
    error::Result, learning::render_learnings, LearningStore, ProjectContext, StoreSet,
    WorkflowConfig,
};

/// Print the top learnings for `project_name` (the current project if unset)
pub async fn handle(
    project_name: Option<String>,
    limit: usize,
    config: WorkflowConfig,
    project: ProjectContext,
) -> Result<()> {
    let stores = StoreSet::on_disk(&config, &project);
    let store = LearningStore::new(stores.learnings);
    let name = project_name.unwrap_or_else(|| project.name.clone());

    let top = store.top(&name, limit).await;
    match render_learnings(&top) {
        Some(text) => println!("{}", text),
        None => println!("No learnings stored for {}", name),
    }

    Ok(())
}
