//! Managed resource model.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// A manifest declared by the user, together with the identity that owns it.
///
/// `name`, `namespace` and `kind` form the identity and never change after
/// creation. Only `content` may be updated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
	pub name: String,
	pub namespace: Option<String>,
	pub kind: String,
	/// Free-form YAML or JSON document.
	pub content: String,
}

impl Manifest {
	/// The namespace, with an empty string treated as unset.
	pub fn namespace(&self) -> Option<&str> {
		self.namespace.as_deref().filter(|ns| !ns.is_empty())
	}

	/// Whether both name and kind are known.
	pub fn has_identity(&self) -> bool {
		!self.name.is_empty() && !self.kind.is_empty()
	}

	pub fn id(&self) -> ResourceId {
		ResourceId {
			kind: self.kind.clone(),
			namespace: self.namespace().map(ToOwned::to_owned),
			name: self.name.clone(),
		}
	}

	/// Arguments selecting this object for `kubectl get` and `kubectl delete`.
	pub(crate) fn selector_args(&self) -> Vec<String> {
		let mut args = vec![self.kind.clone(), self.name.clone()];
		if let Some(namespace) = self.namespace() {
			args.push("-n".to_owned());
			args.push(namespace.to_owned());
		}
		args
	}
}

/// State tracked for one managed resource across operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceData {
	/// Set once the resource exists, cleared when it is gone.
	pub id: Option<ResourceId>,
	pub manifest: Manifest,
}

impl ResourceData {
	pub fn new(manifest: Manifest) -> Self {
		Self { id: None, manifest }
	}

	pub fn with_id(mut self, id: ResourceId) -> Self {
		self.id = Some(id);
		self
	}
}

/// Identity string handed to the host, rendered as `kind/namespace/name`.
///
/// The namespace segment is empty for cluster-wide objects, giving `kind//name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
	pub kind: String,
	pub namespace: Option<String>,
	pub name: String,
}

impl fmt::Display for ResourceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}/{}/{}",
			self.kind,
			self.namespace.as_deref().unwrap_or_default(),
			self.name
		)
	}
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid resource id {0:?}, expected kind/namespace/name")]
pub struct InvalidResourceId(pub String);

impl FromStr for ResourceId {
	type Err = InvalidResourceId;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || InvalidResourceId(s.to_owned());

		let mut parts = s.split('/');
		let (Some(kind), Some(namespace), Some(name), None) =
			(parts.next(), parts.next(), parts.next(), parts.next())
		else {
			return Err(invalid());
		};
		if kind.is_empty() || name.is_empty() {
			return Err(invalid());
		}

		Ok(Self {
			kind: kind.to_owned(),
			namespace: (!namespace.is_empty()).then(|| namespace.to_owned()),
			name: name.to_owned(),
		})
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	fn manifest(namespace: Option<&str>) -> Manifest {
		Manifest {
			name: "web".to_owned(),
			namespace: namespace.map(ToOwned::to_owned),
			kind: "Deployment".to_owned(),
			content: String::new(),
		}
	}

	#[rstest]
	#[case::namespaced(Some("prod"), "Deployment/prod/web")]
	#[case::cluster_wide(None, "Deployment//web")]
	#[case::empty_namespace(Some(""), "Deployment//web")]
	fn test_id_format(#[case] namespace: Option<&str>, #[case] expected: &str) {
		assert_eq!(manifest(namespace).id().to_string(), expected);
	}

	#[rstest]
	#[case::namespaced("Deployment/prod/web")]
	#[case::cluster_wide("ClusterRole//admin")]
	fn test_id_round_trips(#[case] id: &str) {
		let parsed: ResourceId = id.parse().unwrap();
		assert_eq!(parsed.to_string(), id);
	}

	#[test]
	fn test_id_parse_fields() {
		let parsed: ResourceId = "ConfigMap//settings".parse().unwrap();
		assert_eq!(
			parsed,
			ResourceId {
				kind: "ConfigMap".to_owned(),
				namespace: None,
				name: "settings".to_owned(),
			}
		);
	}

	#[rstest]
	#[case::empty("")]
	#[case::two_segments("Deployment/web")]
	#[case::four_segments("a/b/c/d")]
	#[case::missing_kind("/prod/web")]
	#[case::missing_name("Deployment/prod/")]
	fn test_id_parse_rejects(#[case] id: &str) {
		assert_eq!(
			id.parse::<ResourceId>(),
			Err(InvalidResourceId(id.to_owned()))
		);
	}

	#[test]
	fn test_selector_args() {
		assert_eq!(manifest(None).selector_args(), ["Deployment", "web"]);
		assert_eq!(
			manifest(Some("prod")).selector_args(),
			["Deployment", "web", "-n", "prod"]
		);
	}

	#[rstest]
	#[case::complete("web", "Deployment", true)]
	#[case::no_name("", "Deployment", false)]
	#[case::no_kind("web", "", false)]
	fn test_has_identity(#[case] name: &str, #[case] kind: &str, #[case] expected: bool) {
		let manifest = Manifest {
			name: name.to_owned(),
			kind: kind.to_owned(),
			..Manifest::default()
		};
		assert_eq!(manifest.has_identity(), expected);
	}
}
