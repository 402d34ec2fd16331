use super::{Flight, Project};
use crate::{info, warn};
use std::{collections::HashMap, fmt, path::Path};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug)]
pub enum RegistryError {
    /// A non-deleted flight with the same name already exists for the owner.
    DuplicateName(String),
    FlightNotFound(Uuid),
    ProjectNotFound(Uuid),
    Io(std::io::Error),
    Serde(serde_json::Error),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateName(name) => write!(f, "flight name '{name}' already in use"),
            RegistryError::FlightNotFound(id) => write!(f, "flight {id} not found"),
            RegistryError::ProjectNotFound(id) => write!(f, "project {id} not found"),
            RegistryError::Io(e) => write!(f, "catalog i/o failed: {e}"),
            RegistryError::Serde(e) => write!(f, "catalog malformed: {e}"),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<std::io::Error> for RegistryError {
    fn from(value: std::io::Error) -> Self { RegistryError::Io(value) }
}

impl From<serde_json::Error> for RegistryError {
    fn from(value: serde_json::Error) -> Self { RegistryError::Serde(value) }
}

/// Serialized form of the registry.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct Catalog {
    flights: Vec<Flight>,
    projects: Vec<Project>,
}

/// In-memory store of flights and projects. Persistence proper belongs to
/// the surrounding application; [`FlightRegistry::save`] and
/// [`FlightRegistry::load`] only snapshot the catalog to JSON.
#[derive(Debug, Default)]
pub struct FlightRegistry {
    flights: RwLock<HashMap<Uuid, Flight>>,
    projects: RwLock<HashMap<Uuid, Project>>,
}

impl FlightRegistry {
    pub fn new() -> Self { Self::default() }

    /// Loads a catalog snapshot, or starts empty if the file does not exist.
    ///
    /// # Errors
    /// Propagates read and parse failures of an existing file.
    pub async fn load(path: &Path) -> Result<Self, RegistryError> {
        if !tokio::fs::try_exists(path).await? {
            warn!("No catalog at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let catalog: Catalog = serde_json::from_slice(&tokio::fs::read(path).await?)?;
        info!(
            "Loaded {} flights and {} projects from {}",
            catalog.flights.len(),
            catalog.projects.len(),
            path.display()
        );
        Ok(Self {
            flights: RwLock::new(catalog.flights.into_iter().map(|f| (f.uuid(), f)).collect()),
            projects: RwLock::new(catalog.projects.into_iter().map(|p| (p.uuid(), p)).collect()),
        })
    }

    /// Writes a catalog snapshot via a temporary file and rename.
    ///
    /// # Errors
    /// Propagates serialization and write failures.
    pub async fn save(&self, path: &Path) -> Result<(), RegistryError> {
        let mut catalog = Catalog {
            flights: self.flights.read().await.values().cloned().collect(),
            projects: self.projects.read().await.values().cloned().collect(),
        };
        catalog.flights.sort_by_key(Flight::uuid);
        catalog.projects.sort_by_key(Project::uuid);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&catalog)?).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Inserts a flight, enforcing unique `(name, owner)` among non-deleted flights.
    ///
    /// # Errors
    /// [`RegistryError::DuplicateName`] on a name clash.
    pub async fn insert_flight(&self, flight: Flight) -> Result<Uuid, RegistryError> {
        let mut flights = self.flights.write().await;
        if Self::name_taken(&flights, flight.uuid(), flight.name(), flight.owner()) {
            return Err(RegistryError::DuplicateName(flight.name().to_string()));
        }
        let id = flight.uuid();
        flights.insert(id, flight);
        Ok(id)
    }

    /// Renames a flight, keeping `(name, owner)` unique among non-deleted flights.
    ///
    /// # Errors
    /// [`RegistryError::DuplicateName`] on a name clash, [`RegistryError::FlightNotFound`].
    pub async fn rename_flight(&self, id: Uuid, name: &str) -> Result<(), RegistryError> {
        let mut flights = self.flights.write().await;
        let owner = flights.get(&id).ok_or(RegistryError::FlightNotFound(id))?.owner().map(str::to_string);
        if Self::name_taken(&flights, id, name, owner.as_deref()) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        if let Some(flight) = flights.get_mut(&id) {
            flight.set_name(name);
        }
        Ok(())
    }

    /// Brings a soft-deleted flight back, unless its name was taken meanwhile.
    ///
    /// # Errors
    /// [`RegistryError::DuplicateName`] on a name clash, [`RegistryError::FlightNotFound`].
    pub async fn restore_flight(&self, id: Uuid) -> Result<(), RegistryError> {
        let mut flights = self.flights.write().await;
        let flight = flights.get(&id).ok_or(RegistryError::FlightNotFound(id))?;
        let (name, owner) = (flight.name().to_string(), flight.owner().map(str::to_string));
        if Self::name_taken(&flights, id, &name, owner.as_deref()) {
            return Err(RegistryError::DuplicateName(name));
        }
        if let Some(flight) = flights.get_mut(&id) {
            flight.set_deleted(false);
        }
        Ok(())
    }

    /// Shares `ids` as demo flights (`admin` is `None`) or hands them to
    /// `admin`. Either every flight changes or none does.
    ///
    /// # Errors
    /// [`RegistryError::DuplicateName`] if a live flight would then share its
    /// name with another flight of the new owner, [`RegistryError::FlightNotFound`].
    pub async fn reassign_demo(&self, ids: &[Uuid], admin: Option<&str>) -> Result<(), RegistryError> {
        let mut flights = self.flights.write().await;
        let mut claimed: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            let flight = flights.get(id).ok_or(RegistryError::FlightNotFound(*id))?;
            if flight.is_deleted() {
                continue;
            }
            let name = flight.name().to_string();
            let clash = flights.values().any(|f| {
                !ids.contains(&f.uuid()) && !f.is_deleted() && f.name() == name && f.owner() == admin
            });
            if clash || claimed.contains(&name) {
                return Err(RegistryError::DuplicateName(name));
            }
            claimed.push(name);
        }
        for id in ids {
            if let Some(flight) = flights.get_mut(id) {
                match admin {
                    Some(admin) => flight.unmake_demo(admin),
                    None => flight.make_demo(),
                }
            }
        }
        Ok(())
    }

    fn name_taken(flights: &HashMap<Uuid, Flight>, id: Uuid, name: &str, owner: Option<&str>) -> bool {
        flights
            .values()
            .any(|f| f.uuid() != id && !f.is_deleted() && f.name() == name && f.owner() == owner)
    }

    pub async fn flight(&self, id: Uuid) -> Option<Flight> {
        self.flights.read().await.get(&id).cloned()
    }

    /// Runs `mutate` on the stored flight and returns its result.
    ///
    /// # Errors
    /// [`RegistryError::FlightNotFound`] for unknown ids.
    pub async fn update_flight<R, F>(&self, id: Uuid, mutate: F) -> Result<R, RegistryError>
    where F: FnOnce(&mut Flight) -> R {
        let mut flights = self.flights.write().await;
        let flight = flights.get_mut(&id).ok_or(RegistryError::FlightNotFound(id))?;
        Ok(mutate(flight))
    }

    pub async fn remove_flight(&self, id: Uuid) -> Option<Flight> {
        let removed = self.flights.write().await.remove(&id);
        if removed.is_some() {
            for project in self.projects.write().await.values_mut() {
                project.remove_flight(id);
            }
        }
        removed
    }

    /// Flights of `owner` (or the demo flights for `None`) with the given deletion flag.
    pub async fn flights_of(&self, owner: Option<&str>, deleted: bool) -> Vec<Flight> {
        let mut found: Vec<Flight> = self
            .flights
            .read()
            .await
            .values()
            .filter(|f| f.owner() == owner && f.is_deleted() == deleted)
            .cloned()
            .collect();
        found.sort_by_key(Flight::date);
        found
    }

    pub async fn insert_project(&self, project: Project) -> Uuid {
        let id = project.uuid();
        self.projects.write().await.insert(id, project);
        id
    }

    pub async fn project(&self, id: Uuid) -> Option<Project> {
        self.projects.read().await.get(&id).cloned()
    }

    /// Runs `mutate` on the stored project and returns its result.
    ///
    /// # Errors
    /// [`RegistryError::ProjectNotFound`] for unknown ids.
    pub async fn update_project<R, F>(&self, id: Uuid, mutate: F) -> Result<R, RegistryError>
    where F: FnOnce(&mut Project) -> R {
        let mut projects = self.projects.write().await;
        let project = projects.get_mut(&id).ok_or(RegistryError::ProjectNotFound(id))?;
        Ok(mutate(project))
    }

    pub async fn remove_project(&self, id: Uuid) -> Option<Project> {
        self.projects.write().await.remove(&id)
    }

    /// Member flights of `project`, ordered by acquisition date.
    ///
    /// # Errors
    /// [`RegistryError::FlightNotFound`] if a member id is unknown.
    pub async fn project_flights(&self, project: &Project) -> Result<Vec<Flight>, RegistryError> {
        let flights = self.flights.read().await;
        let mut members = project
            .flights()
            .iter()
            .map(|id| flights.get(id).cloned().ok_or(RegistryError::FlightNotFound(*id)))
            .collect::<Result<Vec<_>, _>>()?;
        members.sort_by_key(Flight::date);
        Ok(members)
    }
}
