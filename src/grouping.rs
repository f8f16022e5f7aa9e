use std::collections::HashMap;

use tracing::debug;

use crate::models::{ItemKind, NormalizedItem, OrganizationGroup, RepositoryGroup};

/// Groups code items by repository, busiest repository first.
///
/// Items without a repository are skipped. Repositories with the same item
/// count keep the order in which they were first seen.
pub fn group_by_repository(items: &[NormalizedItem]) -> Vec<RepositoryGroup> {
    let mut groups: Vec<RepositoryGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items.iter().filter(|i| i.kind == ItemKind::Code) {
        let Some(repository) = &item.repository else {
            continue;
        };

        let slot = match index.get(&repository.full_name) {
            Some(slot) => *slot,
            None => {
                groups.push(RepositoryGroup {
                    full_name: repository.full_name.clone(),
                    url: repository.url.clone(),
                    items: Vec::new(),
                });
                index.insert(repository.full_name.clone(), groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].items.push(item.clone());
    }

    for group in groups.iter_mut() {
        group.items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }
    groups.sort_by(|a, b| b.items.len().cmp(&a.items.len()));
    groups
}

/// Rolls repository groups up under the organization named before the first `/`.
///
/// Repositories are renamed to the part after the slash. Names without a
/// slash cannot be attributed to an organization and are left out.
pub fn group_by_organization(repositories: &[RepositoryGroup]) -> Vec<OrganizationGroup> {
    let mut orgs: Vec<OrganizationGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for repo in repositories {
        let Some((org_name, repo_name)) = repo.full_name.split_once('/') else {
            debug!(repository = %repo.full_name, "skipping repository without organization");
            continue;
        };

        let slot = match index.get(org_name) {
            Some(slot) => *slot,
            None => {
                orgs.push(OrganizationGroup {
                    org_name: org_name.to_string(),
                    repositories: Vec::new(),
                });
                index.insert(org_name.to_string(), orgs.len() - 1);
                orgs.len() - 1
            }
        };
        orgs[slot].repositories.push(RepositoryGroup {
            full_name: repo_name.to_string(),
            ..repo.clone()
        });
    }

    for org in orgs.iter_mut() {
        org.repositories.sort_by(|a, b| b.items.len().cmp(&a.items.len()));
    }
    orgs.sort_by(|a, b| b.repositories.len().cmp(&a.repositories.len()));
    orgs
}
