pub mod shotgrid;
