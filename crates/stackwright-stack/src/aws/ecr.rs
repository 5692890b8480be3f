//! ECRリポジトリとイメージビルド

use stackwright_cloud::{Attr, Output, OutputKey, ResourceDescriptor, ResourceGraph, ResourceKind};

/// このスタックがビルドする全イメージのプラットフォーム
pub const ARM64_PLATFORM: &str = "linux/arm64";

const REPOSITORY_URL: OutputKey<String> = OutputKey::new(ResourceKind::EcrRepository, "url");
const IMAGE_URI: OutputKey<String> = OutputKey::new(ResourceKind::EcrImage, "imageUri");

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryArgs {
    /// イメージが残っていてもリポジトリを削除できるようにする
    pub force_delete: bool,
}

impl RepositoryArgs {
    pub fn declare(
        self,
        name: &str,
        graph: &mut ResourceGraph,
    ) -> stackwright_cloud::Result<Repository> {
        graph.add(
            ResourceDescriptor::new(name, ResourceKind::EcrRepository)
                .with("forceDelete", self.force_delete),
        )?;
        Ok(Repository {
            name: name.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Repository {
    name: String,
}

impl Repository {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> Output<String> {
        REPOSITORY_URL.on(&self.name)
    }
}

/// ローカルのコンテキストディレクトリからビルドしリポジトリへpushするイメージ
#[derive(Debug, Clone, PartialEq)]
pub struct ImageArgs {
    repository_url: Output<String>,
    context: String,
}

impl ImageArgs {
    pub fn new(repository_url: Output<String>, context: impl Into<String>) -> Self {
        Self {
            repository_url,
            context: context.into(),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// 常に [`ARM64_PLATFORM`]
    pub fn platform(&self) -> &'static str {
        ARM64_PLATFORM
    }

    pub fn declare(
        self,
        name: &str,
        graph: &mut ResourceGraph,
    ) -> stackwright_cloud::Result<Image> {
        graph.add(
            ResourceDescriptor::new(name, ResourceKind::EcrImage)
                .with("repositoryUrl", Attr::from(self.repository_url.clone()))
                .with("context", self.context.clone())
                .with("platform", self.platform()),
        )?;
        Ok(Image {
            name: name.to_string(),
            args: self,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Image {
    name: String,
    args: ImageArgs,
}

impl Image {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn platform(&self) -> &'static str {
        self.args.platform()
    }

    pub fn image_uri(&self) -> Output<String> {
        IMAGE_URI.on(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_depends_on_repository() {
        let mut graph = ResourceGraph::new();
        let repo = RepositoryArgs { force_delete: true }
            .declare("app-repo", &mut graph)
            .unwrap();
        let image = ImageArgs::new(repo.url(), "./app")
            .declare("app-img", &mut graph)
            .unwrap();

        assert_eq!(image.platform(), "linux/arm64");
        let descriptor = graph.get(ResourceKind::EcrImage, "app-img").unwrap();
        let upstream: Vec<_> = descriptor.dependencies().iter().map(|id| id.urn()).collect();
        assert_eq!(upstream, vec!["awsx:ecr:Repository::app-repo"]);
        assert_eq!(
            descriptor.attr("platform").and_then(Attr::as_str),
            Some("linux/arm64")
        );
        assert_eq!(
            graph
                .get(ResourceKind::EcrRepository, "app-repo")
                .and_then(|repo| repo.attr("forceDelete"))
                .and_then(Attr::as_bool),
            Some(true)
        );
        assert!(graph.validate().is_ok());
    }
}
